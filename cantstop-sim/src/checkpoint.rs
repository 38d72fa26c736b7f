//! Binary checkpoint format for self-play runs.
//!
//! Format:
//! - Header (32 bytes):
//!   - Magic: "CSS1" (4 bytes)
//!   - Version: u32 LE (4 bytes)
//!   - Record count: u64 LE (8 bytes)
//!   - Checksum: u64 LE xxhash of data section (8 bytes)
//!   - Run key: u64 LE (8 bytes), identifies the seed and settings
//! - Data section (record_count × 21 bytes):
//!   - Seed: u64 LE (8 bytes)
//!   - Winner: u8, 0 or 1 (1 byte)
//!   - Turns: u32 LE (4 bytes)
//!   - Busts: u32 LE (4 bytes)
//!   - Banks: u32 LE (4 bytes)
//!
//! Records are sorted by seed.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use cantstop_core::Player;
use xxhash_rust::xxh64::xxh64;

use crate::stats::GameRecord;

const MAGIC: &[u8; 4] = b"CSS1";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 32;
const RECORD_SIZE: usize = 21;

pub struct Checkpoint {
    pub run_key: u64,
    pub records: Vec<GameRecord>,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

impl Checkpoint {
    /// Save finished games to a binary checkpoint file.
    pub fn save(path: &Path, run_key: u64, records: &[GameRecord]) -> io::Result<usize> {
        let mut sorted = records.to_vec();
        sorted.sort_by_key(|r| r.seed);

        let count = sorted.len();

        let mut data = Vec::with_capacity(count * RECORD_SIZE);
        for record in &sorted {
            data.extend_from_slice(&record.seed.to_le_bytes());
            data.push(record.winner.index() as u8);
            data.extend_from_slice(&record.turns.to_le_bytes());
            data.extend_from_slice(&record.busts.to_le_bytes());
            data.extend_from_slice(&record.banks.to_le_bytes());
        }

        let checksum = xxh64(&data, 0);

        // Write a sibling file, then rename it over the old checkpoint
        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);

            writer.write_all(MAGIC)?;
            writer.write_all(&VERSION.to_le_bytes())?;
            writer.write_all(&(count as u64).to_le_bytes())?;
            writer.write_all(&checksum.to_le_bytes())?;
            writer.write_all(&run_key.to_le_bytes())?;

            writer.write_all(&data)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, path)?;

        Ok(count)
    }

    /// Load checkpoint from binary file.
    pub fn load(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(invalid("Invalid checkpoint magic"));
        }

        let version = read_u32(&header, 4);
        if version != VERSION {
            return Err(invalid(format!("Unsupported checkpoint version: {}", version)));
        }

        let count = read_u64(&header, 8) as usize;
        let stored_checksum = read_u64(&header, 16);
        let run_key = read_u64(&header, 24);

        let mut data = vec![0u8; count * RECORD_SIZE];
        reader.read_exact(&mut data)?;

        let computed_checksum = xxh64(&data, 0);
        if computed_checksum != stored_checksum {
            return Err(invalid("Checkpoint checksum mismatch"));
        }

        let mut records = Vec::with_capacity(count);
        for chunk in data.chunks_exact(RECORD_SIZE) {
            let winner = Player::from_index(chunk[8] as usize)
                .ok_or_else(|| invalid(format!("Invalid winner byte: {}", chunk[8])))?;
            records.push(GameRecord {
                seed: read_u64(chunk, 0),
                winner,
                turns: read_u32(chunk, 9),
                busts: read_u32(chunk, 13),
                banks: read_u32(chunk, 17),
            });
        }

        Ok(Checkpoint { run_key, records })
    }
}
