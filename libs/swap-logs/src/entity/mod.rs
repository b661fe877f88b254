pub mod swap_event;

pub use swap_event::SwapEvent;
