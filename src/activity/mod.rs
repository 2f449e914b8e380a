//! Git commit activity summary.
//!
//! Walks the history of the repository containing the content dir and
//! buckets recent commits per day, producing the `git-activity.json`
//! artifact. A missing repository or empty history degrades to an
//! empty dataset instead of failing the command; activity data is
//! decorative and must never block a build.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::log;
use crate::utils::date::DateTimeUtc;
use crate::utils::fs::write_text;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityData {
    /// Generation timestamp, RFC 3339.
    pub updated: String,
    /// Total commits within the window.
    pub total: u64,
    /// Per-day counts, ascending by date.
    pub commits: Vec<DayCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: String,
    pub count: u64,
}

/// Run the activity command.
pub fn run_activity(config: &Config) -> Result<()> {
    let data = match collect(config) {
        Ok(data) => data,
        Err(e) => {
            log!("activity"; "warning: {:#}, writing empty dataset", e);
            empty_dataset()
        }
    };

    let output = config.activity_path();
    let json = serde_json::to_string_pretty(&data).context("Failed to serialize activity data")?;
    write_text(&output, &json)?;
    log!(
        "activity";
        "{} commits over {} days -> {}",
        data.total,
        config.activity.days,
        output.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(())
}

fn collect(config: &Config) -> Result<ActivityData> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0) as i64;
    let repo = gix::discover(config.content_dir())
        .or_else(|_| gix::discover(&config.root))
        .context("no git repository found")?;
    let commit_times = walk_commit_times(&repo)?;
    Ok(bucket_commits(&commit_times, config.activity.days, now))
}

/// Commit timestamps (unix seconds) reachable from HEAD.
fn walk_commit_times(repo: &gix::Repository) -> Result<Vec<i64>> {
    let head = repo.head_commit().context("repository has no commits")?;
    let mut times = Vec::new();
    for info in repo.rev_walk([head.id]).all()? {
        let info = info?;
        let commit = info.object()?;
        times.push(commit.time()?.seconds);
    }
    Ok(times)
}

/// Bucket commit timestamps into per-day counts within the window.
fn bucket_commits(commit_times: &[i64], days: u64, now: i64) -> ActivityData {
    let cutoff = now - (days as i64) * 86_400;

    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    let mut total = 0;
    for &secs in commit_times {
        if secs < cutoff || secs > now {
            continue;
        }
        *buckets.entry(DateTimeUtc::from_unix(secs).to_ymd()).or_default() += 1;
        total += 1;
    }

    ActivityData {
        updated: DateTimeUtc::from_unix(now.max(0)).to_rfc3339(),
        total,
        commits: buckets
            .into_iter()
            .map(|(date, count)| DayCount { date, count })
            .collect(),
    }
}

fn empty_dataset() -> ActivityData {
    ActivityData {
        updated: DateTimeUtc::now().to_rfc3339(),
        total: 0,
        commits: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-15T12:00:00Z
    const NOW: i64 = 1_710_504_000;

    #[test]
    fn test_bucket_commits_counts_per_day() {
        let times = vec![NOW - 100, NOW - 200, NOW - 86_400, NOW - 2 * 86_400];
        let data = bucket_commits(&times, 30, NOW);
        assert_eq!(data.total, 4);
        assert_eq!(
            data.commits,
            vec![
                DayCount { date: "2024-03-13".into(), count: 1 },
                DayCount { date: "2024-03-14".into(), count: 1 },
                DayCount { date: "2024-03-15".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_bucket_commits_window_cutoff() {
        let times = vec![NOW - 100, NOW - 31 * 86_400, NOW + 3600];
        let data = bucket_commits(&times, 30, NOW);
        // Only the in-window commit counts; future timestamps excluded
        assert_eq!(data.total, 1);
        assert_eq!(data.commits.len(), 1);
    }

    #[test]
    fn test_bucket_commits_empty_history() {
        let data = bucket_commits(&[], 30, NOW);
        assert_eq!(data.total, 0);
        assert!(data.commits.is_empty());
        assert_eq!(data.updated, "2024-03-15T12:00:00Z");
    }

    #[test]
    fn test_activity_json_shape() {
        let data = bucket_commits(&[NOW - 100], 30, NOW);
        let json = serde_json::to_value(&data).unwrap();
        assert!(json["updated"].is_string());
        assert_eq!(json["total"], 1);
        assert_eq!(json["commits"][0]["date"], "2024-03-15");
        assert_eq!(json["commits"][0]["count"], 1);
    }
}
