use std::sync::Arc;

use threadline_context::{CharRatioEstimator, PromptAssembler, TokenEstimator, SUMMARY_CONTEXT_PREFIX};
use threadline_llm::{ChatMessage, Role};

fn assembler(system: Option<&str>, budget: usize) -> PromptAssembler {
    PromptAssembler::new(Arc::new(CharRatioEstimator::default()), budget)
        .with_system_prompt(system.map(str::to_string))
}

fn alternating(contents: &[&str]) -> Vec<ChatMessage> {
    contents
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i % 2 == 0 {
                ChatMessage::user(*c)
            } else {
                ChatMessage::assistant(*c)
            }
        })
        .collect()
}

#[test]
fn test_no_system_no_summary_no_history() {
    let prompt = assembler(None, 100).build(&[], None);
    assert!(prompt.is_empty());
}

#[test]
fn test_everything_fits_in_order() {
    let history = alternating(&["m1 content 1", "m2 content 2", "m3 content 3"]);
    let prompt = assembler(Some("S"), 100).build(&history, None);

    assert_eq!(prompt.len(), 4);
    assert_eq!(prompt[0], ChatMessage::system("S"));
    assert_eq!(&prompt[1..], &history[..]);
}

#[test]
fn test_budget_trims_oldest_messages() {
    let estimator = CharRatioEstimator::default();
    let long_message = "x".repeat(80);
    let history = alternating(&[
        "message 1 xx",
        "message 2 xx",
        &long_message,
        &long_message,
        "latest message",
    ]);
    assert_eq!(estimator.estimate("System prompt."), 3);
    assert_eq!(estimator.estimate("message 1 xx"), 3);
    assert_eq!(estimator.estimate(&long_message), 20);

    let prompt = assembler(Some("System prompt."), 50).build(&history, None);

    assert_eq!(prompt.len(), 5);
    let contents = prompt.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join(" ");
    assert!(!contents.contains("message 1"));
    assert!(contents.contains("message 2"));
    assert_eq!(prompt.last().unwrap().content, "latest message");
}

#[test]
fn test_walk_stops_at_first_message_that_does_not_fit() {
    // The oldest message is tiny but sits behind one that does not fit
    let big = "y".repeat(200);
    let history = alternating(&["hi", &big, "newest msg!!"]);

    let prompt = assembler(None, 10).build(&history, None);

    assert_eq!(prompt.len(), 1);
    assert_eq!(prompt[0].content, "newest msg!!");
}

#[test]
fn test_retained_history_is_always_a_contiguous_suffix() {
    let sizes = [3usize, 41, 7, 0, 19, 64, 5, 12, 33, 2, 27, 8];
    let contents: Vec<String> = sizes.iter().map(|n| "z".repeat(n * 4)).collect();
    let history: Vec<ChatMessage> = contents
        .iter()
        .enumerate()
        .map(|(i, c)| ChatMessage::user(format!("{:02}{}", i, c)))
        .collect();

    for budget in 0..300 {
        for system in [None, Some("sys prompt text")] {
            let prompt = assembler(system, budget).build(&history, None);
            let kept: Vec<&ChatMessage> = prompt.iter().filter(|m| m.role == Role::User).collect();
            let start = history.len() - kept.len();
            for (offset, message) in kept.iter().enumerate() {
                assert_eq!(*message, &history[start + offset], "budget {}", budget);
            }
        }
    }
}

#[test]
fn test_summary_all_or_nothing() {
    let estimator = CharRatioEstimator::default();
    let summary = "A summary that costs exactly ten tok";
    let summary_cost = estimator.estimate(&format!("{}{}", SUMMARY_CONTEXT_PREFIX, summary));
    let history = alternating(&["qqqq"]);
    assert_eq!(estimator.estimate("qqqq"), 1);

    for budget in 0..40 {
        let prompt = assembler(None, budget).build(&history, Some(summary));
        let summaries: Vec<&ChatMessage> = prompt.iter().filter(|m| m.role == Role::System).collect();

        if budget >= summary_cost {
            assert_eq!(summaries.len(), 1, "budget {}", budget);
            assert_eq!(summaries[0].content, format!("{}{}", SUMMARY_CONTEXT_PREFIX, summary));
        } else {
            assert!(summaries.is_empty(), "budget {}", budget);
        }
    }
}

#[test]
fn test_oversized_estimates_do_not_overflow() {
    struct Enormous;
    impl TokenEstimator for Enormous {
        fn estimate(&self, _text: &str) -> usize {
            usize::MAX
        }
    }

    let history = alternating(&["one", "two"]);
    let prompt = PromptAssembler::new(Arc::new(Enormous), usize::MAX - 1)
        .with_system_prompt(Some("sys".to_string()))
        .build(&history, Some("summary"));

    // The system prompt is always kept, even past the budget
    assert_eq!(prompt.len(), 1);
    assert_eq!(prompt[0].content, "sys");
}

#[test]
fn test_build_is_idempotent() {
    let history = alternating(&["first question", "first answer", "second question"]);
    let assembler = assembler(Some("Be helpful."), 12);

    let a = assembler.build(&history, Some("earlier context"));
    let b = assembler.build(&history, Some("earlier context"));
    assert_eq!(a, b);
}

#[test]
fn test_custom_estimator_is_used() {
    struct WordEstimator;
    impl TokenEstimator for WordEstimator {
        fn estimate(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    let history = alternating(&["one two three", "four five", "six"]);
    let prompt = PromptAssembler::new(Arc::new(WordEstimator), 3).build(&history, None);

    assert_eq!(prompt.len(), 2);
    assert_eq!(prompt[0].content, "four five");
    assert_eq!(prompt[1].content, "six");
}
