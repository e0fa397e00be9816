//! Quote of the day.
//!
//! The pool rotates by day of year so every session on the same calendar day
//! shows the same quote.

use chrono::{Datelike, NaiveDate};

/// A motivational quote with attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

const QUOTES: &[Quote] = &[
    Quote {
        text: "The secret of getting ahead is getting started.",
        author: "Mark Twain",
    },
    Quote {
        text: "It does not matter how slowly you go as long as you do not stop.",
        author: "Confucius",
    },
    Quote {
        text: "Well done is better than well said.",
        author: "Benjamin Franklin",
    },
    Quote {
        text: "We are what we repeatedly do. Excellence, then, is not an act, but a habit.",
        author: "Will Durant",
    },
    Quote {
        text: "A journey of a thousand miles begins with a single step.",
        author: "Lao Tzu",
    },
    Quote {
        text: "What you do today can improve all your tomorrows.",
        author: "Ralph Marston",
    },
    Quote {
        text: "Discipline is the bridge between goals and accomplishment.",
        author: "Jim Rohn",
    },
    Quote {
        text: "The best way to predict the future is to create it.",
        author: "Peter Drucker",
    },
    Quote {
        text: "Small deeds done are better than great deeds planned.",
        author: "Peter Marshall",
    },
    Quote {
        text: "Success is the sum of small efforts, repeated day in and day out.",
        author: "Robert Collier",
    },
    Quote {
        text: "You do not rise to the level of your goals. You fall to the level of your systems.",
        author: "James Clear",
    },
    Quote {
        text: "Either you run the day or the day runs you.",
        author: "Jim Rohn",
    },
];

/// The quote for a given calendar day.
pub fn quote_for(date: NaiveDate) -> Quote {
    let index = date.ordinal0() as usize % QUOTES.len();
    QUOTES[index]
}
