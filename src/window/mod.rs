//! A Win32 window which feeds raw keyboard and mouse input into the pipeline.

mod builder;
mod class;
mod inner;
mod wnd;

pub use builder::Builder;
pub use wnd::Window;

use class::WindowClass;
use inner::WindowInner;
