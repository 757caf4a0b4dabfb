pub mod badge_list;
pub mod level_complete;
pub mod level_grid;
pub mod play_sidebar;
pub mod problem_card;
pub mod progress_panel;
pub mod timer_bar;
