//! Route tables, one module per resource.

pub mod ai;
pub mod auth;
pub mod health;
pub mod responses;
pub mod surveys;

/// Method, path and purpose of every API route, relative to the API prefix.
pub const ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/health", "Liveness and version"),
    ("GET", "/auth/profile", "Current user"),
    ("POST", "/auth/logout", "Clear the session cookie"),
    ("POST", "/surveys", "Create a survey"),
    ("GET", "/surveys/my-surveys", "Caller's surveys, paginated"),
    ("GET", "/surveys/dashboard/stats", "Dashboard statistics"),
    ("GET", "/surveys/:id", "One survey (public)"),
    ("PATCH", "/surveys/:id", "Update own survey"),
    ("DELETE", "/surveys/:id", "Delete own survey and its responses"),
    ("POST", "/responses", "Submit a response (anonymous allowed)"),
    ("GET", "/responses", "Responses, paginated"),
    ("DELETE", "/responses/:id", "Delete a response"),
    ("POST", "/ai/generate-summary", "Generate and store an AI summary"),
];
