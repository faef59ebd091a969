//! The controller's external collaborators: PGM image I/O, the UI event
//! sink, and the keyboard source. None of these are part of the
//! simulation's core logic — this crate supplies the minimum concrete
//! instances needed to run the controller end to end, behind traits the
//! controller actually programs against.

pub mod error;
pub mod event;
pub mod keys;
pub mod pgm;

pub use error::{Error, Result};
pub use event::{ChannelEventSink, ControllerEvent, ControllerState, EventSink, TracingEventSink};
pub use keys::{CrosstermKeySource, KeyPress, KeySource};
pub use pgm::{FilePgm, ImageSink, ImageSource};
