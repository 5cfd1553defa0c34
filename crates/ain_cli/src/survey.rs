use ain_core::{ClassifiedNewsItem, Impact};
use ain_news::SurveySession;
use ain_storage::ResultsStore;
use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Choice(Impact),
    Quit,
    Unknown,
}

pub fn parse_reply(line: &str) -> Reply {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "positive" | "+" => Reply::Choice(Impact::Positive),
        "n" | "negative" | "-" => Reply::Choice(Impact::Negative),
        "q" | "quit" | "exit" => Reply::Quit,
        _ => Reply::Unknown,
    }
}

/// Ask each headline in turn over stdin, then persist the finished session.
pub async fn run(items: Vec<ClassifiedNewsItem>, results: &ResultsStore) -> Result<()> {
    if items.is_empty() {
        println!("No news available for the survey right now.");
        return Ok(());
    }

    let mut session = SurveySession::new(items, Utc::now());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(item) = session.current() {
        println!();
        println!("Question {} of {}: {}", session.question_number(), session.total(), item.title);
        println!("  {}", item.description);
        println!("Is this development positive or negative for society? [p/n, q to quit]");

        let Some(line) = lines.next_line().await? else {
            println!("Input closed, survey abandoned.");
            return Ok(());
        };
        match parse_reply(&line) {
            Reply::Choice(choice) => {
                if let Some(outcome) = session.answer(choice) {
                    if outcome.correct {
                        println!("Correct: experts also rate it {}.", outcome.expected);
                    } else {
                        println!("Experts rate it {}.", outcome.expected);
                    }
                }
            }
            Reply::Quit => {
                println!("Survey abandoned, nothing saved.");
                return Ok(());
            }
            Reply::Unknown => println!("Please answer p (positive) or n (negative)."),
        }
    }

    let result = session.finish(Utc::now());
    println!();
    println!(
        "You matched expert consensus on {} out of {} AI developments.",
        result.score, result.total_questions
    );
    if results.append_survey_result(result).await? {
        println!("Result saved.");
    } else {
        println!("A result was saved moments ago; skipping duplicate.");
    }
    Ok(())
}
