pub mod facebook_graph;
pub mod google_oauth2;
