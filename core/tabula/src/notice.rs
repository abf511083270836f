//! FILENAME: core/tabula/src/notice.rs
//! PURPOSE: User-facing notices raised by the engine.
//! CONTEXT: How a notice is shown (toast, banner, status line) is up to the
//! host's `Notifier`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::warn;
use serde::Serialize;
use tabula_export::ExportFormat;

/// Serialized as `{"kind": "exportFailed", ...}` for hosts that forward
/// notices to a UI as events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    /// An export could not be produced; no artifact was returned.
    ExportFailed { format: ExportFormat, message: String },
    /// Some rows refused selection.
    SelectionVetoed { count: usize },
    /// The row source reported an error.
    LoadFailed { message: String },
    /// The row source rejected the session.
    Unauthorized,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ExportFailed { format, message } => {
                write!(f, "Could not export {}: {}", format.extension().to_uppercase(), message)
            }
            Notice::SelectionVetoed { count: 1 } => write!(f, "1 row cannot be selected"),
            Notice::SelectionVetoed { count } => write!(f, "{} rows cannot be selected", count),
            Notice::LoadFailed { message } => write!(f, "Could not load data: {}", message),
            Notice::Unauthorized => write!(f, "Your session is not authorized to view this data"),
        }
    }
}

/// Receives notices for display.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Default notifier: writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        warn!("{}", notice);
    }
}

/// Keeps every notice; hosts drain it on their own schedule.
#[derive(Debug, Default, Clone)]
pub struct NoticeQueue {
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.notices.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.borrow().is_empty()
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
