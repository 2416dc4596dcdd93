pub mod app;
pub mod board;
pub mod gateway;
pub mod ports;
pub mod session;
pub mod source;

pub use app::{BoardContext, GoalsBoard, Notice, NoticeKind, StriveApplication};
pub use board::GroupedBoard;
pub use gateway::{GoalsGateway, UsersGateway};
pub use ports::{GoalsRepo, LoadError, PageLoader, PersistError, StatusWriter, UserGateway};
pub use session::Session;
pub use source::{DataSource, SourceOptions};
