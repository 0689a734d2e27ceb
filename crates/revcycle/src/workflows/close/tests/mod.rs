mod checklist;
mod common;
