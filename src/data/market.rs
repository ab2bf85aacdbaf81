use std::fmt;

/// An independently monitored ticker list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    /// Tickers quoted through Alpha Vantage.
    Global,
    /// Warsaw tickers quoted through Stooq.
    Polish,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Global, Market::Polish];

    pub fn name(&self) -> &'static str {
        match self {
            Market::Global => "global",
            Market::Polish => "polish",
        }
    }

    pub fn raw_file_name(&self) -> String {
        format!("{}_input.txt", self.name())
    }

    pub fn dump_file_name(&self) -> String {
        format!("{}_tickers.json", self.name())
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
