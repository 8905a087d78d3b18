pub mod context;
pub mod event;
pub mod page;
pub mod update;

pub use context::{ModuleContext, SsrForm};
pub use event::Event;
pub use page::Page;
