//! Integration tests for the forum-bench scenarios live under `tests/`.
