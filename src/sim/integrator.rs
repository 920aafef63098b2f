// ---------------------------------------------------------------------------
// Semi-implicit (symplectic) Euler
// ---------------------------------------------------------------------------

/// Advance `(position, velocity)` by `dt` under constant `acceleration`.
///
/// Velocity is updated first and the new velocity drives the position update.
pub fn semi_implicit_euler(position: f64, velocity: f64, acceleration: f64, dt: f64) -> (f64, f64) {
    let velocity = velocity + acceleration * dt;
    let position = position + velocity * dt;
    (position, velocity)
}
