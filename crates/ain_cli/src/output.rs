use ain_core::{CacheInfo, CacheStatus, ClassifiedNewsItem, DisplayNewsItem};
use ain_news::{DashboardStats, FetchOutput};

pub fn format_millis(ms: i64) -> String {
    let secs = ms.max(0) / 1000;
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {}m", h, m)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

pub fn cache_line(name: &str, info: Option<&CacheInfo>) -> String {
    match info {
        None => format!("{:<8} empty", name),
        Some(info) if info.is_expired => format!(
            "{:<8} {} items, expired ({} old)",
            name,
            info.item_count,
            format_millis(info.age)
        ),
        Some(info) => format!(
            "{:<8} {} items, age {}, expires in {}",
            name,
            info.item_count,
            format_millis(info.age),
            format_millis(info.expires_in)
        ),
    }
}

pub fn print_cache_status(status: &CacheStatus) {
    println!("{}", cache_line("survey", status.survey.as_ref()));
    println!("{}", cache_line("display", status.display.as_ref()));
}

fn survey_line(item: &ClassifiedNewsItem) -> String {
    format!(
        "{:>2}. [{:<8}] {:<15} {}% / {} sources  {}",
        item.id,
        item.impact.as_str(),
        item.category,
        item.accuracy,
        item.sources,
        item.title
    )
}

fn display_line(item: &DisplayNewsItem) -> String {
    format!(
        "{:>2}. [{:<9}] {:<15} {} | {} | {} | {} views\n    {}",
        item.id,
        item.status.as_str(),
        item.category,
        item.author,
        item.published_at,
        item.read_time,
        item.views,
        item.title
    )
}

pub fn print_news(output: &FetchOutput) {
    match output {
        FetchOutput::Survey(items) => {
            for item in items {
                println!("{}", survey_line(item));
                println!("    {}", item.description);
            }
        }
        FetchOutput::Display(items) => {
            for item in items {
                println!("{}", display_line(item));
                println!("    {}", item.excerpt);
            }
        }
    }
}

pub fn print_stats(stats: &DashboardStats) {
    println!("Surveys completed:        {}", stats.total_surveys);
    println!("Questions answered:       {}", stats.total_questions_answered);
    println!("Sentiment alignment:      {}%", stats.sentiment_alignment_rate);
    println!("Average score per survey: {:.1}", stats.average_score_per_survey);
    println!("Average questions:        {}", stats.average_questions_per_survey);
    println!("Average completion:       {} min", stats.average_completion_minutes);
    println!("Surveys in last 7 days:   {}", stats.recent_surveys);
    println!(
        "Feed chamber sessions:    {} ({} recent, avg engagement {})",
        stats.feed_sessions, stats.recent_feed_sessions, stats.average_engagement
    );
    if !stats.top_categories.is_empty() {
        println!("Top categories:");
        for category in &stats.top_categories {
            println!(
                "  {:<15} {} total ({} positive, {} negative)",
                category.name, category.total, category.positive, category.negative
            );
        }
    }
}
