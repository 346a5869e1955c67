//! Landing page.
//!
//! Everything here is static marketing copy. The only state is which
//! pricing topics are expanded, carried in `?open=`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::Query, response::IntoResponse};
use market_secret_core::TopicToggles;
use serde::Deserialize;

use crate::filters;

// =============================================================================
// Static content
// =============================================================================

/// A curriculum module card.
pub struct CurriculumModule {
    pub title: &'static str,
    pub lessons: &'static str,
    pub duration: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

/// A testimonial card.
pub struct Testimonial {
    pub name: &'static str,
    pub profit: &'static str,
    pub timeframe: &'static str,
    pub image_url: &'static str,
    pub quote: &'static str,
}

/// An expandable line in a pricing package.
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// A pricing package.
pub struct Package {
    pub name: &'static str,
    pub price: &'static str,
    pub summary: &'static str,
    pub cta: &'static str,
    pub popular: bool,
    pub topics: &'static [Topic],
}

pub const CURRICULUM: [CurriculumModule; 6] = [
    CurriculumModule {
        title: "Forex Fundamentals",
        lessons: "12 lessons",
        duration: "3 hours",
        description: "Learn currency pairs, market structure, and basic terminology",
        icon: "book-open",
    },
    CurriculumModule {
        title: "Technical Analysis",
        lessons: "18 lessons",
        duration: "5 hours",
        description: "Master chart patterns, indicators, and price action strategies",
        icon: "bar-chart",
    },
    CurriculumModule {
        title: "Trading Strategies",
        lessons: "15 lessons",
        duration: "4 hours",
        description: "Proven strategies for scalping, day trading, and swing trading",
        icon: "target",
    },
    CurriculumModule {
        title: "Risk Management",
        lessons: "10 lessons",
        duration: "2.5 hours",
        description: "Protect your capital with proper position sizing and stop losses",
        icon: "shield",
    },
    CurriculumModule {
        title: "Trading Psychology",
        lessons: "8 lessons",
        duration: "2 hours",
        description: "Develop the mindset of successful traders and control emotions",
        icon: "zap",
    },
    CurriculumModule {
        title: "Live Trading",
        lessons: "20 sessions",
        duration: "10 hours",
        description: "Practice with real market conditions and expert guidance",
        icon: "globe",
    },
];

pub const TESTIMONIALS: [Testimonial; 3] = [
    Testimonial {
        name: "Sarah Johnson",
        profit: "$45,000",
        timeframe: "6 months",
        image_url: "https://images.pexels.com/photos/774909/pexels-photo-774909.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
        quote: "I went from knowing nothing about forex to making consistent profits. The course structure is amazing!",
    },
    Testimonial {
        name: "Michael Chen",
        profit: "$78,000",
        timeframe: "8 months",
        image_url: "https://images.pexels.com/photos/1222271/pexels-photo-1222271.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
        quote: "The risk management module saved me from huge losses. Now I trade with confidence and discipline.",
    },
    Testimonial {
        name: "Emma Rodriguez",
        profit: "$32,000",
        timeframe: "4 months",
        image_url: "https://images.pexels.com/photos/1239291/pexels-photo-1239291.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop",
        quote: "The live trading sessions were game-changers. Learning from real market conditions made all the difference.",
    },
];

const STARTER_TOPICS: [Topic; 5] = [
    Topic {
        id: "forex-basics",
        title: "Forex Basics",
        description: "Understand the foundations of currency trading.",
    },
    Topic {
        id: "smc-course",
        title: "SMC Full Course",
        description: "Learn Smart Money Concepts used by professional traders.",
    },
    Topic {
        id: "smc-trade-plan",
        title: "SMC Trade Plan",
        description: "Step-by-step plan for executing trades with SMC strategies.",
    },
    Topic {
        id: "risk-management",
        title: "Risk Management",
        description: "Learn how to protect your capital and trade safely.",
    },
    Topic {
        id: "psychology-mindset",
        title: "Psychology & Mindset Mastery (Basic)",
        description: "Build discipline, patience, and a strong trading mindset.",
    },
];

const ADVANCED_TOPICS: [Topic; 9] = [
    Topic {
        id: "advanced-forex-basics",
        title: "Forex Basics",
        description: "Reinforce foundational knowledge.",
    },
    Topic {
        id: "advanced-smc-course",
        title: "SMC Full Course",
        description: "In-depth study of institutional trading strategies.",
    },
    Topic {
        id: "advanced-smc-trade-plan",
        title: "SMC Trade Plan",
        description: "Execute SMC trades with confidence.",
    },
    Topic {
        id: "elliott-wave-course",
        title: "Elliott Wave Full Course",
        description: "Learn wave analysis to predict market movements.",
    },
    Topic {
        id: "elliott-wave-trade-plan",
        title: "Elliott Wave Trade Plan",
        description: "Practical trade plan using Elliott Wave strategies.",
    },
    Topic {
        id: "smc-wave-trade-plan",
        title: "SMC + Wave Trade Plan",
        description: "Combined strategies for high-probability trades.",
    },
    Topic {
        id: "advanced-risk-management",
        title: "Risk Management",
        description: "Advanced techniques to protect and grow your capital.",
    },
    Topic {
        id: "advanced-psychology-mindset",
        title: "Psychology & Mindset Mastery (Full Course)",
        description: "Complete program to master trading emotions and mindset.",
    },
    Topic {
        id: "weekly-live-mentorship",
        title: "Weekly Live Mentorship",
        description: "Two live Zoom sessions per week with Huzaifar to discuss trades, ask questions, and get personalized guidance.",
    },
];

pub const PACKAGES: [Package; 2] = [
    Package {
        name: "Starter Package",
        price: "$497",
        summary: "Perfect for beginners who want a solid foundation in Forex trading and Smart Money Concepts (SMC).",
        cta: "Get Starter Package",
        popular: false,
        topics: &STARTER_TOPICS,
    },
    Package {
        name: "Advanced Package",
        price: "$997",
        summary: "For traders who want to master SMC, Elliott Wave, and advanced trading strategies with live guidance.",
        cta: "Get Advanced Package",
        popular: true,
        topics: &ADVANCED_TOPICS,
    },
];

// =============================================================================
// View models
// =============================================================================

/// A pricing topic with its current expand state.
pub struct TopicView {
    pub title: &'static str,
    pub description: &'static str,
    pub expanded: bool,
    /// Link that flips this topic and leaves the others alone.
    pub toggle_href: String,
}

pub struct PackageView {
    pub name: &'static str,
    pub price: &'static str,
    pub summary: &'static str,
    pub cta: &'static str,
    pub popular: bool,
    pub topics: Vec<TopicView>,
}

fn toggle_href(toggles: &TopicToggles, topic_id: &str) -> String {
    let next = toggles.toggled(topic_id).to_query();
    if next.is_empty() {
        "/#pricing".to_string()
    } else {
        format!("/?open={}#pricing", urlencoding::encode(&next))
    }
}

fn package_views(toggles: &TopicToggles) -> Vec<PackageView> {
    PACKAGES
        .iter()
        .map(|package| PackageView {
            name: package.name,
            price: package.price,
            summary: package.summary,
            cta: package.cta,
            popular: package.popular,
            topics: package
                .topics
                .iter()
                .map(|topic| TopicView {
                    title: topic.title,
                    description: topic.description,
                    expanded: toggles.is_expanded(topic.id),
                    toggle_href: toggle_href(toggles, topic.id),
                })
                .collect(),
        })
        .collect()
}

// =============================================================================
// Handler
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LandingQuery {
    pub open: Option<String>,
}

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub curriculum: &'static [CurriculumModule],
    pub testimonials: &'static [Testimonial],
    pub packages: Vec<PackageView>,
}

/// Display the landing page.
pub async fn landing(Query(query): Query<LandingQuery>) -> impl IntoResponse {
    let toggles = TopicToggles::from_query(query.open.as_deref());
    LandingTemplate {
        curriculum: &CURRICULUM,
        testimonials: &TESTIMONIALS,
        packages: package_views(&toggles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded_titles(views: &[PackageView]) -> Vec<&'static str> {
        views
            .iter()
            .flat_map(|p| p.topics.iter())
            .filter(|t| t.expanded)
            .map(|t| t.title)
            .collect()
    }

    #[test]
    fn test_everything_collapsed_by_default() {
        let views = package_views(&TopicToggles::default());
        assert!(expanded_titles(&views).is_empty());
        assert_eq!(views[0].topics.len(), 5);
        assert_eq!(views[1].topics.len(), 9);
    }

    #[test]
    fn test_open_query_expands_only_named_topics() {
        let toggles = TopicToggles::from_query(Some("smc-course,weekly-live-mentorship"));
        let views = package_views(&toggles);
        assert_eq!(
            expanded_titles(&views),
            vec!["SMC Full Course", "Weekly Live Mentorship"]
        );
    }

    #[test]
    fn test_toggle_link_flips_one_topic() {
        let toggles = TopicToggles::from_query(Some("forex-basics"));
        assert_eq!(toggle_href(&toggles, "forex-basics"), "/#pricing");
        assert_eq!(
            toggle_href(&toggles, "smc-course"),
            "/?open=forex-basics%2Csmc-course#pricing"
        );
    }

    #[test]
    fn test_topic_ids_are_unique() {
        let mut ids: Vec<&str> = PACKAGES
            .iter()
            .flat_map(|p| p.topics.iter().map(|t| t.id))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_package_prices() {
        assert_eq!(PACKAGES[0].price, "$497");
        assert_eq!(PACKAGES[1].price, "$997");
    }
}
