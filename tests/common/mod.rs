#![allow(dead_code)]

use std::fs;
use std::io::Error;
use std::path::Path;

pub const ASSET_DB: &str = r#"{
  "Dark Blue": {
    "Boardwalk": {
      "land_price": 400,
      "house_price": 200,
      "rent": {
        "no_houses": 50,
        "one_house": 200,
        "two_houses": 600,
        "three_houses": 1400,
        "four_houses": 1700
      }
    },
    "Park Place": {
      "land_price": 350,
      "house_price": 200,
      "rent": {
        "no_houses": 35,
        "one_house": 175,
        "two_houses": 500,
        "three_houses": 1100,
        "four_houses": 1300
      }
    }
  },
  "Brown": {
    "Old Kent Road": {
      "land_price": 60,
      "house_price": 50,
      "rent": {
        "no_houses": 2,
        "one_house": 10,
        "two_houses": 30,
        "three_houses": 90,
        "four_houses": 160
      }
    }
  }
}"#;

pub const COMMERCIAL_DB: &str = r#"{
  "Utilities": {
    "Water Works": { "price": 150, "multiplier": { "1 owned": 4, "2 owned": 10 } },
    "Electric Company": { "price": 150, "multiplier": { "1 owned": 4, "2 owned": 10 } }
  },
  "Stations": {
    "King's Cross": { "price": 200, "ticket": { "1 owned": 25, "2 owned": 50 } }
  }
}"#;

/// Writes both catalogs into `dir` under their default file names.
pub fn write_catalogs(dir: &Path) -> Result<(), Error> {
    fs::write(dir.join("Asset_database.json"), ASSET_DB)?;
    fs::write(dir.join("Commercial_properties.json"), COMMERCIAL_DB)?;
    Ok(())
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("Failed to read document");
    serde_json::from_str(&text).expect("Document is not valid JSON")
}

pub fn ownership(dir: &Path) -> serde_json::Value {
    read_json(&dir.join("Player_database.json"))
}

pub fn accounts(dir: &Path) -> serde_json::Value {
    read_json(&dir.join("Player_accounts.json"))
}
