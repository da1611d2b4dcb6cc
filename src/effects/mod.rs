pub mod desktop_grid;
