pub mod plot_view;
pub mod raster;
