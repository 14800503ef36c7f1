//! Behavioral suites for both gate strategies.

mod classifier_outcomes;
