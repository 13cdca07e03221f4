pub mod browse;
pub mod executor;
pub mod news;
pub mod push;
pub mod registry;
pub mod schema;
pub mod search;
pub mod write_file;

pub use browse::WebBrowseTool;
pub use executor::ToolExecutor;
pub use news::{resolve_news_url, ResolveNewsUrlTool};
pub use push::PushNotificationTool;
pub use registry::{Tool, ToolRegistry};
pub use schema::tool_call_schema_json;
pub use search::SearchTool;
pub use write_file::{WriteFileTool, Workspace};
