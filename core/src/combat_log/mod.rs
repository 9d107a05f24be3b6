mod combat_event;
mod error;
mod parser;
mod raw_event;
mod reader;

pub use combat_event::*;
pub use error::{ParseError, ReaderError};
pub use parser::{EventParser, Ingested};
pub use raw_event::{RawAbilityRef, RawEvent, TypeCode};
pub use reader::{EventDump, Reader};
