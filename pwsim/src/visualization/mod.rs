pub mod export;
pub mod packet_view;
pub mod trajectory_view;
