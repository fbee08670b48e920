//! Workspace integration tests for the dagtron engine, organized as unit
//! trees per concern.
