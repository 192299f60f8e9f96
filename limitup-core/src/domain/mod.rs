//! Domain types for LimitUp Lab

pub mod annotated;
pub mod bar;
pub mod dates;
pub mod instrument;
pub mod trade;

pub use annotated::AnnotatedBar;
pub use bar::{BarRow, DailyBar};
pub use dates::{format_trade_date, parse_trade_date, DateParseError};
pub use instrument::{Board, Instrument, InstrumentProfile, InstrumentTable, ParseBoardError};
pub use trade::{EquityPoint, Trade};
