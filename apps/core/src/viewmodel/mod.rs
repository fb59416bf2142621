//! Pure, stateless view-model derivations: flat entity lists in,
//! presentation structures out. Each is independently testable and holds
//! no reference back into the stores.

pub mod calendar;
pub mod kanban;

pub use calendar::{month_grid, CalendarCell, MonthGrid};
pub use kanban::{kanban_columns, KanbanColumn};
