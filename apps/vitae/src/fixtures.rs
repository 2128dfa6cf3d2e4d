//! Shared test fixtures: one realistic master store and two roles.
//!
//! Parsed from JSON text so map keys keep their written order, which is
//! deliberately not alphabetical.

use crate::generation::{derive, DeriveOptions};
use crate::models::view::{Audience, Length, View};
use crate::models::{MasterStore, RoleRegistry};

pub fn make_master() -> MasterStore {
    serde_json::from_str(
        r#"{
        "personal_info": {
            "name": "Jordan Rivera",
            "email": "jordan@example.com",
            "phone": "(512) 555-0142",
            "website": "https://jordanrivera.dev",
            "linkedin": "https://linkedin.com/in/jordanrivera",
            "github": "https://github.com/jrivera",
            "location": "Austin, TX",
            "tagline": "Backend systems that stay up",
            "location_url": "https://maps.example.com/?q=Austin,TX"
        },
        "professional_summary": {
            "comprehensive": "Engineer with twelve years across backend, platform and data work.",
            "backend": "Backend engineer focused on reliable, observable services handling high request volumes.",
            "platform": "Platform engineer building paved roads for product teams."
        },
        "key_achievements": {
            "delivery": [
                "Cut p99 latency 40% on the payments API",
                "Migrated 120 services to Kubernetes with zero downtime",
                "Reduced cloud spend by $1.2M per year"
            ],
            "leadership": [
                "Mentored 9 engineers to senior level",
                "Led a 14-person incident response rotation",
                "Ran the backend guild for three years"
            ]
        },
        "key_projects": {
            "ledger": {
                "name": "Double-Entry Ledger",
                "dates": "2021 - 2022",
                "description": "Event-sourced ledger backing every money movement.",
                "technologies": ["Rust", "PostgreSQL", "Kafka"],
                "impact": "Zero reconciliation breaks since launch",
                "technical_details": ["Idempotent writes keyed by request id", "Snapshots every 10k events"]
            },
            "pipeline": {
                "name": "Build Pipeline",
                "description": "Hermetic CI with remote caching.",
                "technologies": ["Bazel", "Go"]
            },
            "dashboard": {
                "name": "SLO Dashboard",
                "dates": "2019",
                "description": "Service level tracking for 300 services.",
                "technologies": ["Grafana", "Prometheus"],
                "impact": "Paging volume down by half"
            }
        },
        "work_experience": {
            "initech": {
                "title": "Staff Engineer",
                "company": "Initech",
                "location": "Austin, TX",
                "dates": "Jan 2020 - Present",
                "subtitle": "Payments platform",
                "responsibilities": [
                    "Own the payments API serving 8k requests per second",
                    "Designed the ledger service and its migration plan",
                    "Run quarterly capacity reviews",
                    "Set the on-call standards for 6 teams"
                ]
            },
            "globex": {
                "title": "Senior Engineer",
                "company": "Globex",
                "location": "Remote",
                "dates": "2017 - 2020",
                "responsibilities": [
                    "Built the order routing service in Go",
                    "Introduced contract testing across 30 services",
                    "Cut deploy time from 40 to 6 minutes",
                    "Led the Kubernetes migration",
                    "Wrote the service template used by every new team",
                    "Interviewed over 100 candidates"
                ]
            },
            "acme": {
                "title": "Software Engineer",
                "company": "Acme Corp",
                "location": "Dallas, TX",
                "dates": "2015 - 2017",
                "responsibilities": [
                    "Maintained the billing batch jobs",
                    "Added monitoring to legacy cron workloads"
                ]
            },
            "hooli": {
                "title": "Junior Developer",
                "company": "Hooli",
                "location": "Houston, TX",
                "dates": "2012 - 2015",
                "responsibilities": ["Built internal admin tools"]
            }
        },
        "technical_skills_comprehensive": {
            "languages": {
                "rust": "async services, CLIs",
                "go": "network services",
                "python": "tooling and data scripts"
            },
            "cloud_native": {
                "kubernetes": "operators, autoscaling",
                "terraform": "multi-account AWS"
            },
            "tools": ["Git: daily driver", "Docker: image hardening", "Bazel"]
        },
        "education": [
            {
                "degree": "B.S. Computer Science",
                "institution": "University of Texas",
                "location": "Austin, TX",
                "dates": "2008 - 2012",
                "details": ["Systems track"]
            }
        ],
        "certifications": [
            {"name": "Certified Kubernetes Administrator", "issuer": "CNCF", "dates": "2021"}
        ]
    }"#,
    )
    .unwrap()
}

pub fn make_roles() -> RoleRegistry {
    let roles = serde_json::from_str(
        r#"{
        "backend": {
            "summary_key": "backend",
            "include_positions": ["acme", "initech", "globex", "hooli"],
            "max_responsibilities_per_job": 4,
            "responsibility_overrides": {"globex": 6},
            "include_projects": ["ledger", "pipeline", "dashboard"],
            "show_technical_details": true,
            "include_achievements": ["delivery", "leadership"],
            "total_max": 5,
            "include_skill_categories": ["languages", "cloud_native", "tools"]
        },
        "platform": {
            "summary_key": "platform",
            "include_positions": ["initech", "globex"],
            "max_responsibilities_per_job": 3,
            "include_projects": ["pipeline"],
            "include_achievements": ["delivery"],
            "total_max": 2,
            "include_skill_categories": ["cloud_native", "tools"]
        }
    }"#,
    )
    .unwrap();
    RoleRegistry::from_map(roles).unwrap()
}

pub fn make_view(length: Length, audience: Audience) -> View {
    derive(
        &make_master(),
        &make_roles(),
        "backend",
        length,
        audience,
        DeriveOptions::default(),
    )
    .unwrap()
}
