//! Word frequency report built from stages
//!
//! Pipeline:
//! 1. Segment: split every line into words
//! 2. Frequency: words seen at least 3 times (sequential) and words seen
//!    exactly once (parallel, since at-most-N can merge partial state)
//! 3. Filter: drop punctuation-only segments
//!
//! Usage: cargo run --example word_frequency --release
//!        (Then type lines of text and press Ctrl-D to finish)

use std::io::{self, BufRead};
use stream_stages::stages::{AtLeast, AtMost, DistinctBy, FilterWithIndex, Segmenting};
use stream_stages::{Pipeline, PipelineBuilder, Stage};

fn is_word(segment: &str) -> bool {
    segment.chars().any(char::is_alphanumeric)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Word Frequency Report");
    println!("=====================");
    println!("Enter lines of text (Ctrl-D to finish):");
    println!();

    let lines: Vec<String> = io::stdin()
        .lock()
        .lines()
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|line| line.to_lowercase())
        .collect();

    let frequent = Segmenting::words()
        .and_then(FilterWithIndex::filter(|_, segment: &String| is_word(segment)))
        .and_then(AtLeast::new(3))
        .and_then(DistinctBy::new(String::clone));
    let frequent_words = Pipeline::sequential().collect(&frequent, lines.clone())?;

    let rare = Segmenting::words().and_then(AtMost::new(1));
    let pipeline = PipelineBuilder::new()
        .parallel()
        .min_split_len(64)
        .build()?;
    let rare_words: Vec<String> = pipeline
        .collect(&rare, lines)?
        .into_iter()
        .filter(|word| is_word(word))
        .collect();

    println!("\n=== Words used at least 3 times ===");
    for (i, word) in frequent_words.iter().enumerate() {
        println!("{:3}. {}", i + 1, word);
    }

    println!("\n=== Words used exactly once ({}) ===", rare_words.len());
    println!("{}", rare_words.join(", "));

    println!("\n{}", pipeline.metrics().snapshot().format());

    Ok(())
}
