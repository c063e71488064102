//! # Neighborly Formatters
//!
//! Pure text shaping for the vendor directory: raw strings stored by the
//! backend go in, display strings come out. Every function here is total;
//! malformed input falls back to a readable value instead of an error.
//!
//! ## Example
//!
//! ```
//! use neighborly_formatters::format_author_label;
//! use neighborly_formatters::format_us_phone_display;
//!
//! assert_eq!(format_author_label(Some("John Smith|Oak St")), "John S. on Oak St");
//! assert_eq!(format_us_phone_display("5551234567"), "(555) 123-4567");
//! ```

mod author;
mod badge;
mod category;
mod name;
mod phone;

pub use author::format_author_label;
pub use badge::format_badge_name;
pub use category::Category;
pub use category::FALLBACK_EMOJI;
pub use category::FALLBACK_ICON;
pub use category::Icon;
pub use category::ParseCategoryError;
pub use category::category_emoji;
pub use category::category_icon;
pub use name::format_name_with_last_initial;
pub use phone::format_us_phone_display;

/// Label shown when no usable identity is attached to a row.
pub const ANONYMOUS_LABEL: &str = "Neighbor";
