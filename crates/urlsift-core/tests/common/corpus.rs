//! Synthetic labeled URLs for end-to-end tests.
//!
//! Benign URLs are short https links on readable domains; malicious ones are long http links
//! on raw IPs or random-looking hosts with many query parameters.

use urlsift_core::config::{BoostingConfig, ForestConfig, TrainingConfig};
use urlsift_core::label::Label;

const WORDS: &[&str] = &[
    "news", "shop", "docs", "mail", "blog", "maps", "wiki", "music", "video", "cloud",
];

pub fn benign_url(i: usize) -> String {
    let word = WORDS[i % WORDS.len()];
    match i % 3 {
        0 => format!("https://www.{word}.com/"),
        1 => format!("https://{word}.org/about/team"),
        _ => format!("https://{word}{}.net/index.html", i % 7),
    }
}

pub fn malicious_url(i: usize) -> String {
    match i % 2 {
        0 => format!(
            "http://10.{}.{}.{}/wp-admin/login.php?id={}&session=8f3a{}&redirect=1",
            i % 250,
            (i * 7) % 250,
            (i * 13) % 250,
            i * 31,
            i
        ),
        _ => format!(
            "http://secure-update.xq{}zk7v{}.account-verify.ru/a/b/c/confirm?u={}&t={}&k=9",
            i * 3,
            i % 10,
            i,
            i * 17
        ),
    }
}

pub fn corpus(benign: usize, malicious: usize) -> (Vec<String>, Vec<Label>) {
    let mut urls: Vec<String> = (0..benign).map(benign_url).collect();
    let mut labels = vec![Label::Benign; benign];
    urls.extend((0..malicious).map(malicious_url));
    labels.extend(vec![Label::Malicious; malicious]);
    (urls, labels)
}

/// Small learners so end-to-end tests stay fast.
pub fn quick_config() -> TrainingConfig {
    TrainingConfig {
        forest: ForestConfig {
            n_trees: 20,
            ..ForestConfig::default()
        },
        boosting: BoostingConfig {
            n_rounds: 20,
            ..BoostingConfig::default()
        },
        ..TrainingConfig::default()
    }
}
