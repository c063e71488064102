use neighborly_formatters::Category;
use neighborly_formatters::Icon;
use neighborly_formatters::category_emoji;
use neighborly_formatters::category_icon;
use neighborly_formatters::format_author_label;
use neighborly_formatters::format_name_with_last_initial;
use neighborly_formatters::format_us_phone_display;
use serde::Deserialize;
use serde::Serialize;

pub type VendorId = String;

/// A service provider listed in the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    /// Stored label; older rows may carry free-form values.
    pub category: String,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub google_rating: Option<f64>,
    #[serde(default)]
    pub google_rating_count: Option<i64>,
}

impl Vendor {
    /// Canonical category, if the stored label is one.
    pub fn category(&self) -> Option<Category> {
        self.category.parse().ok()
    }

    /// Canonical labels match case-insensitively; anything else goes
    /// through the legacy table.
    pub fn emoji(&self) -> &'static str {
        self.category()
            .map_or_else(|| category_emoji(&self.category), Category::emoji)
    }

    pub fn icon(&self) -> Icon {
        self.category()
            .map_or_else(|| category_icon(&self.category), Category::icon)
    }

    pub fn contact_display(&self) -> Option<String> {
        self.contact_info.as_deref().map(format_us_phone_display)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub vendor_id: VendorId,
    pub rating: i32,
    #[serde(default)]
    pub author_label: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Review {
    pub fn author_display(&self) -> String {
        format_author_label(self.author_label.as_deref())
    }
}

/// A cost data point. Amount fields are passed through as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub id: String,
    pub vendor_id: VendorId,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub author_label: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl CostEntry {
    pub fn author_display(&self) -> String {
        format_author_label(self.author_label.as_deref())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub street_name: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        format_name_with_last_initial(self.name.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointReward {
    pub id: String,
    #[serde(alias = "activity_name")]
    pub activity: String,
    pub points: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// The signed-in user's review of one vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReview {
    pub rating: i32,
    pub review_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub is_logged_in: bool,
    pub is_verified: bool,
    pub profile: Option<UserProfile>,
}
