//! Row models for the portal's tables.
//!
//! Each struct mirrors the wire shape the backend returns; `New*` structs are the
//! bodies sent on insert. Ids are normalised to strings whatever JSON type the
//! backend used for them.

pub mod announcement;
pub mod bookmark;
pub mod course;
pub mod note;
pub mod note_history;
pub mod profile;
pub mod reminder;
pub mod subject;
pub mod todo;
pub mod wire;

pub use announcement::{Announcement, AnnouncementType, NewAnnouncement};
pub use bookmark::{Bookmark, NewBookmark};
pub use course::{Course, CourseUpdate, NewCourse, SubjectRef};
pub use note::{NewNote, Note, NoteStatus};
pub use note_history::{HistoryAction, NewHistoryEntry, NoteHistory};
pub use profile::{Profile, ProfileUpdate, Role};
pub use reminder::{NewReminder, Reminder, ReminderType};
pub use subject::{NewSubject, Subject};
pub use todo::{NewTodo, Todo};
