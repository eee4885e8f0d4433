//! # TUI Components
//!
//! Every widget on the panel lives here.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built fresh each frame from the data they draw:
//! - `TitleBar`: identity, node URL, connection state, status message
//! - `TabBar`: gossip, search and peer tabs
//! - `Message`: one rendered message row
//!
//! ### Stateful Components (Event-Driven)
//!
//! A persistent state struct owned by `TuiState`, wrapped each frame by a
//! transient renderer:
//! - `InputBox`: the command / message line
//! - `MessageList` + `MessageListState`: the scrolling feed
//! - `PeerList`, `RouteList`, `SearchResults` + `ListPaneState`: selectable lists
//!
//! Components receive data as props instead of reaching into `App`:
//!
//! ```rust,ignore
//! let rows = render_peers(&app.peers);
//! PeerList { state: &mut tui.peer_pane, rows: &rows, focused }.render(frame, area);
//! ```
//!
//! ```text
//! components/
//! ├── title_bar.rs       (top status line)
//! ├── tab_bar.rs         (view strip)
//! ├── message.rs         (single message)
//! ├── message_list.rs    (scrolling feed with layout cache)
//! ├── list_pane.rs       (cursor state shared by the lists)
//! ├── peer_list.rs       (sidebar: peers)
//! ├── route_list.rs      (sidebar: routes)
//! ├── search_results.rs  (search view body)
//! └── input_box.rs       (single-line input)
//! ```

pub mod input_box;
pub mod list_pane;
pub mod message;
pub mod message_list;
pub mod peer_list;
pub mod route_list;
pub mod search_results;
pub mod tab_bar;
pub mod title_bar;

pub use input_box::{InputBox, InputEvent};
pub use list_pane::{ListPaneEvent, ListPaneState};
pub use message_list::{MessageList, MessageListState};
pub use peer_list::PeerList;
pub use route_list::RouteList;
pub use search_results::SearchResults;
pub use tab_bar::TabBar;
pub use title_bar::TitleBar;
