pub mod diag;
pub mod error;
pub mod event;
pub mod param;
pub mod transport;
pub mod ui;
pub mod value;

pub use error::UiError;
pub use param::{Origin, Param};
pub use ui::{WebUi, WebUiBuilder};
pub use value::{Color, ParamKind, Vec2, Vec3};

pub type Result<T, E = UiError> = std::result::Result<T, E>;

pub trait Builder {
    type Output;
    fn build(self) -> Result<Self::Output>;
}
