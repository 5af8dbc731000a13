// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use serde::{self, Deserialize, Deserializer};

/// Raw coordinate as it may appear in a server response.
///
/// Decimal model fields are rendered as strings by some serializers, so both
/// `28.61` and `"28.61"` have to be accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Number(f64),
    Text(String),
}

/// Parses a coordinate string like `" 28.61"` into an `f64`.
pub fn parse_coordinate(value: &str) -> Result<f64, std::num::ParseFloatError> {
    value.trim().parse::<f64>()
}

/// Deserialize a coordinate given either as JSON number or numeric string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let coordinate = match RawCoordinate::deserialize(deserializer)? {
        RawCoordinate::Number(value) => value,
        RawCoordinate::Text(text) => parse_coordinate(&text).map_err(serde::de::Error::custom)?,
    };
    if !coordinate.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "Coordinate {coordinate} is not a finite number"
        )));
    }
    Ok(coordinate)
}
