// Configuration loading
pub mod config;

// Live event model
pub mod event;

// In-process live event channel
pub mod hub;

// Character and config persistence
pub mod store;

// Portrait initial load and reactive view
pub mod portrait;

// Dice presentation sequencer
pub mod dice;

// Live portrait page sessions
pub mod session;

// Room-scoped WebSocket subscriptions
pub mod subscription;

// HTTP and WebSocket APIs
pub mod api;
