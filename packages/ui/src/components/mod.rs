//! Small building blocks shared by every view.

mod alert;
pub use alert::{Alert, AlertKind};

mod badge;
pub use badge::Badge;

mod button;
pub use button::{Button, ButtonVariant};

mod input;
pub use input::{Checkbox, Input, Select};

mod label;
pub use label::{FieldError, Label};

mod spinner;
pub use spinner::Spinner;

mod tabs;
pub use tabs::{TabBar, TabItem};

mod textarea;
pub use textarea::{Textarea, TextareaVariant};
