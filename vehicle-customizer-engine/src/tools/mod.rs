pub mod option_panel;
