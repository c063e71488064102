use std::future::Future;

use anyhow::Result;
use anyhow::anyhow;
use clap::Parser;
use clap::Subcommand;
use neighborly_directory::AuthState;
use neighborly_directory::CostEntry;
use neighborly_directory::Directory;
use neighborly_directory::PointReward;
use neighborly_directory::QueryHandle;
use neighborly_directory::QueryKey;
use neighborly_directory::Review;
use neighborly_directory::Vendor;
use neighborly_formatters::Category;
use neighborly_formatters::Icon;
use serde::Serialize;

use crate::ListArgs;

#[derive(Debug, Subcommand)]
pub enum DirectoryCommand {
    /// Point rewards, highest value first.
    Rewards(ListArgs),

    /// Vendors by name, optionally limited to one category.
    Vendors(VendorsArgs),

    /// Cost entries shared for one vendor.
    VendorCosts(VendorArgs),

    /// Reviews of one vendor, newest first.
    VendorReviews(VendorArgs),

    /// Your reviews, keyed by vendor.
    MyReviews(ListArgs),

    /// Vendors you marked as home vendors.
    HomeVendors(ListArgs),

    /// Vendors you have shared costs for.
    MyCostVendors(ListArgs),

    /// Sign-in and verification status.
    Whoami,

    /// Admin flags for the signed-in user.
    AdminStatus,

    /// Refresh stored Google ratings for every vendor.
    BackfillRatings,
}

#[derive(Debug, Parser)]
pub struct VendorsArgs {
    /// Category label, e.g. "Pool Service".
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<Category>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct VendorArgs {
    pub vendor_id: String,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run one backend-driven command and return what should be printed.
pub async fn execute(directory: &Directory, command: &DirectoryCommand) -> Result<String> {
    match command {
        DirectoryCommand::Rewards(args) => {
            let rewards = load(key("point_rewards"), directory.point_rewards()).await?;
            output(&rewards, args.json, || render_rewards(&rewards))
        }
        DirectoryCommand::Vendors(args) => {
            let query_key = QueryKey::new("vendors", args.category.map(Category::label));
            let vendors = load(query_key, directory.vendors(args.category)).await?;
            let rows: Vec<VendorRow<'_>> = vendors.iter().map(VendorRow::from).collect();
            output(&rows, args.json, || render_vendors(&vendors))
        }
        DirectoryCommand::VendorCosts(args) => {
            let costs = load(
                QueryKey::new("vendor_costs", [args.vendor_id.as_str()]),
                directory.vendor_costs(&args.vendor_id),
            )
            .await?;
            output(&costs, args.json, || render_costs(&costs))
        }
        DirectoryCommand::VendorReviews(args) => {
            let reviews = load(
                QueryKey::new("vendor_reviews", [args.vendor_id.as_str()]),
                directory.vendor_reviews(&args.vendor_id),
            )
            .await?;
            output(&reviews, args.json, || render_reviews(&reviews))
        }
        DirectoryCommand::MyReviews(args) => {
            let reviews = load(key("user_reviews"), directory.user_reviews()).await?;
            output(&reviews, args.json, || {
                let lines: Vec<String> = reviews
                    .iter()
                    .map(|(vendor_id, review)| {
                        format!("{vendor_id}  {}/5  (review {})", review.rating, review.review_id)
                    })
                    .collect();
                or_empty(lines, "You have not reviewed any vendors.")
            })
        }
        DirectoryCommand::HomeVendors(args) => {
            let vendors = load(key("user_home_vendors"), directory.user_home_vendors()).await?;
            output(&vendors, args.json, || {
                or_empty(vendors.iter().cloned().collect(), "No home vendors.")
            })
        }
        DirectoryCommand::MyCostVendors(args) => {
            let vendors = load(key("user_cost_vendors"), directory.user_cost_vendors()).await?;
            output(&vendors, args.json, || {
                or_empty(
                    vendors.keys().cloned().collect(),
                    "You have not shared any costs.",
                )
            })
        }
        DirectoryCommand::Whoami => {
            let state = load(key("auth_state"), async {
                Ok::<_, String>(directory.auth_state().await)
            })
            .await?;
            Ok(render_auth_state(&state))
        }
        DirectoryCommand::AdminStatus => {
            let (admin, hoa_admin) = load(key("admin_status"), async {
                Ok::<_, String>(tokio::join!(directory.is_admin(), directory.is_hoa_admin()))
            })
            .await?;
            Ok(format!(
                "admin: {}\nhoa admin: {}",
                yes_no(admin),
                yes_no(hoa_admin)
            ))
        }
        DirectoryCommand::BackfillRatings => {
            let result = load(
                key("backfill_google_ratings"),
                directory.backfill_google_ratings(),
            )
            .await?;
            Ok(serde_json::to_string_pretty(&result)?)
        }
    }
}

/// Drive one request through a [`QueryHandle`], reporting the loading
/// state on stderr.
async fn load<T, E, Fut>(key: QueryKey, fetch: Fut) -> Result<T>
where
    E: std::fmt::Display,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut handle = QueryHandle::new();
    let ticket = handle.begin(key);
    if let Some(line) = handle.state().status_line() {
        eprintln!("{line}");
    }
    let result = fetch.await;
    handle.resolve(ticket, result);
    match handle.into_state().into_result() {
        Some(Ok(data)) => Ok(data),
        Some(Err(message)) => Err(anyhow!(message)),
        None => Err(anyhow!("request did not settle")),
    }
}

/// A vendor as printed by `vendors --json`, with its display glyphs.
#[derive(Serialize)]
struct VendorRow<'a> {
    #[serde(flatten)]
    vendor: &'a Vendor,
    emoji: &'static str,
    icon: Icon,
}

impl<'a> From<&'a Vendor> for VendorRow<'a> {
    fn from(vendor: &'a Vendor) -> Self {
        Self {
            vendor,
            emoji: vendor.emoji(),
            icon: vendor.icon(),
        }
    }
}

fn key(name: &str) -> QueryKey {
    QueryKey::new(name, Vec::<String>::new())
}

fn output<T: Serialize>(data: &T, json: bool, render: impl FnOnce() -> String) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(data)?)
    } else {
        Ok(render())
    }
}

fn or_empty(lines: Vec<String>, empty: &str) -> String {
    if lines.is_empty() {
        empty.to_string()
    } else {
        lines.join("\n")
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn render_rewards(rewards: &[PointReward]) -> String {
    let lines = rewards
        .iter()
        .map(|reward| match &reward.description {
            Some(description) => {
                format!("{:>5}  {} - {description}", reward.points, reward.activity)
            }
            None => format!("{:>5}  {}", reward.points, reward.activity),
        })
        .collect();
    or_empty(lines, "No rewards yet.")
}

fn render_vendors(vendors: &[Vendor]) -> String {
    let lines = vendors
        .iter()
        .map(|vendor| {
            let label = vendor
                .category()
                .map(Category::label)
                .unwrap_or(vendor.category.as_str());
            let mut line = format!("{} {} ({label})", vendor.emoji(), vendor.name);
            if let Some(contact) = vendor.contact_display() {
                line.push_str(&format!("  {contact}"));
            }
            if let Some(rating) = vendor.google_rating {
                let count = vendor.google_rating_count.unwrap_or_default();
                line.push_str(&format!("  ★ {rating:.1} ({count})"));
            }
            line
        })
        .collect();
    or_empty(lines, "No vendors found.")
}

fn render_costs(costs: &[CostEntry]) -> String {
    let lines = costs
        .iter()
        .map(|cost| {
            let amount = cost
                .amount
                .map_or_else(|| "-".to_string(), |amount| format!("${amount:.2}"));
            let per = match (cost.unit.as_deref(), cost.period.as_deref()) {
                (Some(unit), Some(period)) => format!(" {unit}/{period}"),
                (Some(unit), None) => format!(" {unit}"),
                (None, Some(period)) => format!(" /{period}"),
                (None, None) => String::new(),
            };
            format!("{amount}{per}  by {}", cost.author_display())
        })
        .collect();
    or_empty(lines, "No costs shared yet.")
}

fn render_reviews(reviews: &[Review]) -> String {
    let lines = reviews
        .iter()
        .map(|review| {
            let stars = format!("{}/5  {}", review.rating, review.author_display());
            match review.comments.as_deref().map(str::trim) {
                Some(comments) if !comments.is_empty() => format!("{stars}: {comments}"),
                _ => stars,
            }
        })
        .collect();
    or_empty(lines, "No reviews yet.")
}

fn render_auth_state(state: &AuthState) -> String {
    if !state.is_logged_in {
        return "Not signed in.".to_string();
    }
    let verified = if state.is_verified {
        "verified"
    } else {
        "unverified"
    };
    match &state.profile {
        Some(profile) => match profile.street_name.as_deref() {
            Some(street) => format!("{} on {street} ({verified})", profile.display_name()),
            None => format!("{} ({verified})", profile.display_name()),
        },
        None => format!("Signed in ({verified})"),
    }
}
