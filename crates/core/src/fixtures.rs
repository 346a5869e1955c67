//! Seed catalog for the in-memory content store.
//!
//! The IDs are fixed so that links stay stable across restarts of a
//! process that has no hosted backend configured.

use chrono::{DateTime, TimeDelta, Utc};

use crate::content::{ContentEntity, StoryDraft, SuccessStory, Video, VideoDraft};
use crate::types::{PackageType, StoryId, VideoId};

/// Days from the Unix epoch to 2024-01-01.
const SEED_EPOCH_DAYS: i64 = 19_723;

fn seeded_at(day_offset: i64) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::days(SEED_EPOCH_DAYS + day_offset)
}

struct SeedVideo {
    title: &'static str,
    description: &'static str,
    module: &'static str,
    order_index: i32,
    package_type: PackageType,
    day: i64,
}

const SEED_VIDEOS: &[SeedVideo] = &[
    SeedVideo {
        title: "Introduction to Forex Markets",
        description: "Understanding the basics of currency trading",
        module: "Forex Basics",
        order_index: 1,
        package_type: PackageType::Both,
        day: 0,
    },
    SeedVideo {
        title: "Currency Pairs Explained",
        description: "Major, minor, and exotic currency pairs",
        module: "Forex Basics",
        order_index: 2,
        package_type: PackageType::Both,
        day: 0,
    },
    SeedVideo {
        title: "Market Structure Basics",
        description: "How institutional traders view the market",
        module: "SMC Course",
        order_index: 1,
        package_type: PackageType::Both,
        day: 1,
    },
    SeedVideo {
        title: "Order Blocks and Fair Value Gaps",
        description: "Advanced SMC concepts",
        module: "SMC Course",
        order_index: 2,
        package_type: PackageType::Both,
        day: 1,
    },
    SeedVideo {
        title: "Elliott Wave Theory",
        description: "Understanding wave patterns",
        module: "Elliott Wave",
        order_index: 1,
        package_type: PackageType::Advanced,
        day: 2,
    },
    SeedVideo {
        title: "Wave Counting Techniques",
        description: "Advanced wave analysis",
        module: "Elliott Wave",
        order_index: 2,
        package_type: PackageType::Advanced,
        day: 2,
    },
    SeedVideo {
        title: "Forex Basics Introduction",
        description: "Learn the fundamentals of forex trading",
        module: "Forex Basics",
        order_index: 1,
        package_type: PackageType::Both,
        day: 0,
    },
    SeedVideo {
        title: "SMC Market Structure",
        description: "Understanding institutional market structure",
        module: "SMC Course",
        order_index: 1,
        package_type: PackageType::Both,
        day: 1,
    },
    SeedVideo {
        title: "Elliott Wave Patterns",
        description: "Advanced wave analysis techniques",
        module: "Elliott Wave",
        order_index: 1,
        package_type: PackageType::Advanced,
        day: 2,
    },
];

/// The seeded video catalog, in display order.
#[must_use]
pub fn videos() -> Vec<Video> {
    SEED_VIDEOS
        .iter()
        .zip(1_u128..)
        .map(|(seed, n)| {
            Video::from_draft(
                VideoId::from_u128(n),
                seeded_at(seed.day),
                VideoDraft {
                    title: seed.title.to_owned(),
                    description: seed.description.to_owned(),
                    video_url: format!("https://example.com/video{n}"),
                    thumbnail_url: None,
                    module: seed.module.to_owned(),
                    order_index: seed.order_index,
                    package_type: seed.package_type,
                },
            )
        })
        .collect()
}

/// The seeded success stories.
#[must_use]
pub fn stories() -> Vec<SuccessStory> {
    let seeds = [
        (
            "Sarah Johnson",
            "$45,000",
            "6 months",
            "Amazing course that changed my life!",
            "https://images.pexels.com/photos/774909/pexels-photo-774909.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
        ),
        (
            "Michael Chen",
            "$78,000",
            "8 months",
            "Best investment I ever made.",
            "https://images.pexels.com/photos/1222271/pexels-photo-1222271.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
        ),
    ];

    seeds
        .into_iter()
        .zip((1_u128..).zip(0_i64..))
        .map(|((name, profit, timeframe, testimonial, image), (n, day))| {
            SuccessStory::from_draft(
                StoryId::from_u128(n),
                seeded_at(day),
                StoryDraft {
                    student_name: name.to_owned(),
                    profit_amount: profit.to_owned(),
                    timeframe: timeframe.to_owned(),
                    testimonial: testimonial.to_owned(),
                    image_url: Some(image.to_owned()),
                    is_featured: true,
                },
            )
        })
        .collect()
}
