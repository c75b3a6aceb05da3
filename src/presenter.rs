use console_core::StatusView;

/// The four views the console switches between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Main,
    /// Firmware selection and the "update" action
    Update,
    /// Upload in flight
    Updating,
    Credits,
}

/// Everything the session needs from a UI.
///
/// Implementations only draw; they never call back into the session.
pub trait Presenter {
    fn render_status(&mut self, status: &StatusView);

    fn show_panel(&mut self, panel: Panel);

    /// Show an upload failure. Called once per failed attempt.
    fn report_failure(&mut self, message: &str);

    /// Remove any failure currently shown
    fn clear_failure(&mut self);

    /// The device accepted the image and is restarting
    fn upload_succeeded(&mut self, message: &str);
}
