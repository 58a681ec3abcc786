use log::warn;

use gazelink_shared::{
    CalibrationChannel, CalibrationState, GazePoint, PointIndex, ServiceReturnCode,
};

use crate::error::CalibrationError;
use crate::state::StateHandle;

/// Everything an accepted calibration request carries: the per-session
/// service channel and the registration keeping the SDK calibrating.
pub struct CalibrationGrant {
    channel: Box<dyn CalibrationChannel>,
    handle: StateHandle,
}

impl CalibrationGrant {
    pub(crate) fn new(channel: Box<dyn CalibrationChannel>, handle: StateHandle) -> Self {
        Self { channel, handle }
    }
}

/// A live calibration session.
///
/// The service owns the point schedule; the host's side of the contract is to
/// report readiness once, then display each point the channel asks for and
/// mark the moment it became visible. The session tracks enough of that
/// conversation to refuse calls made out of order.
///
/// Dropping an unfinished session aborts it service-side. Either way the
/// state registration is released when the session ends, so the SDK settles
/// out of the calibrating state on the following tick.
pub struct CalibrationSession {
    channel: Box<dyn CalibrationChannel>,
    handle: Option<StateHandle>,
    ready_reported: bool,
    marks_sent: u32,
    forced_state: Option<CalibrationState>,
}

impl CalibrationSession {
    pub(crate) fn new(grant: CalibrationGrant) -> Self {
        Self {
            channel: grant.channel,
            handle: Some(grant.handle),
            ready_reported: false,
            marks_sent: 0,
            forced_state: None,
        }
    }

    /// Session phase. Once the session is aborted locally this reports
    /// [`CalibrationState::FinishedFailed`] regardless of the channel.
    pub fn state(&self) -> CalibrationState {
        self.forced_state.unwrap_or_else(|| self.channel.status())
    }

    /// Index of the point the service currently wants displayed.
    pub fn point_index(&self) -> PointIndex {
        self.channel.point_index()
    }

    /// Position of the point the service currently wants displayed.
    pub fn current_point(&self) -> GazePoint {
        self.channel.current_point()
    }

    /// Service-provided description of the outcome, once finished.
    pub fn result_description(&self) -> Option<String> {
        self.channel.result_description()
    }

    /// Tells the service the host is ready to display calibration points.
    /// Safe to call again once it has succeeded; repeats are no-ops.
    pub fn report_ready_to_display_points(&mut self) -> Result<(), CalibrationError> {
        self.ensure_active()?;
        if self.ready_reported {
            return Ok(());
        }
        match self.channel.report_ready()? {
            ServiceReturnCode::Successful => {
                self.ready_reported = true;
                Ok(())
            }
            code => Err(CalibrationError::Refused { code }),
        }
    }

    /// Reports that `point` just became visible to the user.
    ///
    /// Marks may not outpace the service: the n-th mark requires the service
    /// point index to have reached n.
    pub fn mark_start_of_point_display(&mut self, point: GazePoint) -> Result<(), CalibrationError> {
        self.ensure_active()?;
        if !self.ready_reported {
            return Err(CalibrationError::ReadyNotReported);
        }
        let index = self.channel.point_index();
        if self.marks_sent >= index {
            return Err(CalibrationError::MarkOutpacedPointIndex {
                marks: self.marks_sent,
                index,
            });
        }
        match self.channel.mark_point_displayed(point)? {
            ServiceReturnCode::Successful => {
                self.marks_sent += 1;
                Ok(())
            }
            code => Err(CalibrationError::Refused { code }),
        }
    }

    /// Ends the session as failed. A session that already reached a terminal
    /// state is left as-is; either way the state registration is released.
    pub fn abort(&mut self) {
        self.finish_failed();
    }

    fn ensure_active(&self) -> Result<(), CalibrationError> {
        let state = self.state();
        if state.is_terminal() {
            return Err(CalibrationError::SessionFinished { state });
        }
        Ok(())
    }

    fn finish_failed(&mut self) {
        if !self.state().is_terminal() {
            match self.channel.abort() {
                Ok(ServiceReturnCode::Successful)
                | Ok(ServiceReturnCode::NoCalibrationOngoing) => {}
                Ok(code) => warn!("Aborting the calibration returned {code:?}"),
                Err(link_error) => warn!("Aborting the calibration failed: {link_error}"),
            }
            self.forced_state = Some(CalibrationState::FinishedFailed);
        }
        self.handle = None;
    }
}

impl Drop for CalibrationSession {
    fn drop(&mut self) {
        self.finish_failed();
    }
}
