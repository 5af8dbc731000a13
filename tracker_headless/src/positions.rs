// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use anyhow::{Context, Result, bail};
use common::{position::Position, serde::coordinate::parse_coordinate};
use std::io::Read;
use tracing::debug;

/// Reads simulated positions from CSV records of the form `longitude,latitude`.
///
/// The first line is treated as header.
pub fn read_positions<R: Read>(reader: R) -> Result<Vec<Position>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut positions = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Invalid CSV record {}", line + 1))?;
        let (Some(longitude), Some(latitude)) = (record.get(0), record.get(1)) else {
            bail!("CSV record {} needs longitude and latitude", line + 1);
        };
        let longitude = parse_coordinate(longitude)
            .with_context(|| format!("Invalid longitude in record {}", line + 1))?;
        let latitude = parse_coordinate(latitude)
            .with_context(|| format!("Invalid latitude in record {}", line + 1))?;
        positions.push(Position::new(latitude, longitude));
    }
    debug!("length of positions: {}", positions.len());
    Ok(positions)
}

pub fn read_positions_from_file(file_path: &str) -> Result<Vec<Position>> {
    let file = std::fs::File::open(file_path)
        .with_context(|| format!("Failed to open position file {file_path}"))?;
    read_positions(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_longitude_latitude_records() {
        let csv = "longitude,latitude\n77.2090,28.6139\n77.2101, 28.6145\n";
        let positions = read_positions(csv.as_bytes()).unwrap();
        assert_eq!(
            positions,
            vec![
                Position::new(28.6139, 77.2090),
                Position::new(28.6145, 77.2101)
            ]
        );
    }

    #[test]
    fn reject_invalid_coordinate() {
        let csv = "longitude,latitude\n77.2090,north\n";
        assert!(read_positions(csv.as_bytes()).is_err());
    }

    #[test]
    fn reject_missing_column() {
        let csv = "longitude\n77.2090\n";
        assert!(read_positions(csv.as_bytes()).is_err());
    }
}
