use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use log::{info, warn, debug};

use crate::data::market::Market;
use crate::data::quote::{Frequency, QuoteSample};
use crate::data::ticker::{parse_base64_csv, TickerRecord};
use crate::error::Result;

/// Flat-file persistence of one market's uploaded ticker list.
///
/// The raw upload is what survives a restart; the JSON dump is written for
/// inspection only and never read back.
#[derive(Debug, Clone)]
pub struct TickerStore {
    dir: PathBuf,
    market: Market,
}

impl TickerStore {
    pub fn new(dir: impl Into<PathBuf>, market: Market) -> Self {
        Self {
            dir: dir.into(),
            market,
        }
    }

    pub fn raw_path(&self) -> PathBuf {
        self.dir.join(self.market.raw_file_name())
    }

    pub fn dump_path(&self) -> PathBuf {
        self.dir.join(self.market.dump_file_name())
    }

    pub fn save_raw(&self, content: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.raw_path();
        fs::write(&path, content)?;
        info!("Saved {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    /// Returns the stored upload, or an empty string when nothing was saved yet.
    pub fn load_raw(&self) -> Result<String> {
        let path = self.raw_path();
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("File not found at {}, treating as empty", path.display());
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_records(&self, records: &[TickerRecord]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(records)?;
        fs::write(self.dump_path(), json)?;
        debug!("Dumped {} {} records to {}", records.len(), self.market, self.dump_path().display());
        Ok(())
    }

    pub fn load_records(&self) -> Result<Vec<TickerRecord>> {
        parse_base64_csv(&self.load_raw()?)
    }
}

/// Writes fetched samples to `<dir>/<ticker>_<frequency>.json` for debugging.
pub fn dump_quotes(dir: &Path, ticker: &str, frequency: Frequency, samples: &[QuoteSample]) -> Result<()> {
    fs::create_dir_all(dir)?;
    let safe_ticker: String = ticker
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    let path = dir.join(format!("{}_{}.json", safe_ticker, frequency.as_str().to_lowercase()));
    fs::write(&path, serde_json::to_string_pretty(samples)?)?;
    debug!("Dumped {} samples to {}", samples.len(), path.display());
    Ok(())
}
