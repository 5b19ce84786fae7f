/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use crate::operation::Face;
use crate::Float;
use serde::{Deserialize, Serialize};

/// The air temperature assumed when none is given, in $`C`$
pub const DEFAULT_AIR_TEMPERATURE: Float = 20.;

const NATURAL_COEFFICIENT: Float = 1.31;
const FORCED_STILL_AIR: Float = 11.4;
const FORCED_WIND_FACTOR: Float = 5.7;

/// Something that tells how much heat leaves a solid through its
/// surface, used as the boundary condition of the solver.
///
/// It is evaluated once per boundary point and per iteration, with the
/// temperature that point had on the previous iteration. It must be `Sync`
/// so that points can be updated in parallel.
pub trait HeatFlux: Sync {
    /// The heat flux leaving the solid through `face`, in $`W/m^2`$, when
    /// the surface is at `surface_temperature` (in $`C`$). Negative values
    /// mean that heat enters the solid.
    fn flux(&self, face: Face, surface_temperature: Float) -> Float;
}

/// Any function of the surface temperature can be a boundary
/// condition. The same flux is applied to all faces.
impl<F> HeatFlux for F
where
    F: Fn(Float) -> Float + Sync,
{
    fn flux(&self, _face: Face, surface_temperature: Float) -> Float {
        self(surface_temperature)
    }
}

/// How the air moves around the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConvectionRegime {
    /// Still air, moved only by buoyancy
    Natural,

    /// Air blown at a certain speed (e.g., by a fan)
    Forced {
        /// The wind speed, in m/s
        wind_speed: Float,
    },
}

/// Heat dissipation from a surface into the surrounding air.
///
/// # The math
///
/// For natural convection
///
/// ```math
/// q = 1.31 (T_s - T_a)^{4/3}
/// ```
///
/// and for forced convection
///
/// ```math
/// q = (11.4 + 5.7 v)(T_s - T_a)
/// ```
///
/// where $`T_s`$ is the surface temperature, $`T_a`$ the air temperature and
/// $`v`$ the wind speed.
///
/// The natural convection law is a fractional power of $`\Delta T`$, which is
/// not real for surfaces colder than the air. In that case the sign is
/// preserved, i.e., $`q = -1.31 |\Delta T|^{4/3}`$, meaning that the air heats
/// the surface up in the same way it would cool it down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Convection {
    /// The dry bulb temperature of the air, in $`C`$
    pub air_temperature: Float,

    /// Natural or forced
    pub regime: ConvectionRegime,
}

impl std::default::Default for Convection {
    fn default() -> Self {
        Self::natural(DEFAULT_AIR_TEMPERATURE)
    }
}

impl Convection {
    /// Natural convection into air at `air_temperature`
    pub fn natural(air_temperature: Float) -> Self {
        Self {
            air_temperature,
            regime: ConvectionRegime::Natural,
        }
    }

    /// Forced convection into air at `air_temperature` moving at `wind_speed`
    pub fn forced(air_temperature: Float, wind_speed: Float) -> Self {
        Self {
            air_temperature,
            regime: ConvectionRegime::Forced { wind_speed },
        }
    }

    /// The convection coefficient $`h`$ (in $`W/m^2.K`$) so that
    /// $`q = h (T_s - T_a)`$
    pub fn heat_transfer_coefficient(&self, surface_temperature: Float) -> Float {
        let delta_t = surface_temperature - self.air_temperature;
        match self.regime {
            ConvectionRegime::Natural => NATURAL_COEFFICIENT * delta_t.abs().powf(1. / 3.),
            ConvectionRegime::Forced { wind_speed } => {
                FORCED_STILL_AIR + FORCED_WIND_FACTOR * wind_speed
            }
        }
    }

    /// The heat flux leaving a surface at `surface_temperature`, in $`W/m^2`$
    pub fn heat_flux(&self, surface_temperature: Float) -> Float {
        let delta_t = surface_temperature - self.air_temperature;
        match self.regime {
            ConvectionRegime::Natural => {
                NATURAL_COEFFICIENT * delta_t.abs().powf(4. / 3.).copysign(delta_t)
            }
            ConvectionRegime::Forced { .. } => {
                self.heat_transfer_coefficient(surface_temperature) * delta_t
            }
        }
    }

    /// The temperature gradient (in $`K/m`$) at the surface of a material
    /// of conductivity `thermal_conductivity` that dissipates
    /// [`Self::heat_flux`]
    pub fn temperature_gradient(
        &self,
        surface_temperature: Float,
        thermal_conductivity: Float,
    ) -> Float {
        self.heat_flux(surface_temperature) / thermal_conductivity
    }
}

impl HeatFlux for Convection {
    fn flux(&self, _face: Face, surface_temperature: Float) -> Float {
        self.heat_flux(surface_temperature)
    }
}

/// A fixed heat flux on each face, independent of the temperature.
///
/// This is the classic Neumann boundary condition.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaceFlux {
    /// Flux leaving through faces that look towards $`-x`$, in $`W/m^2`$
    pub left: Float,
    /// Flux leaving through faces that look towards $`+x`$, in $`W/m^2`$
    pub right: Float,
    /// Flux leaving through faces that look towards $`-y`$, in $`W/m^2`$
    pub bottom: Float,
    /// Flux leaving through faces that look towards $`+y`$, in $`W/m^2`$
    pub top: Float,
}

impl FaceFlux {
    /// The same flux leaving through every face
    pub fn uniform(flux: Float) -> Self {
        Self {
            left: flux,
            right: flux,
            bottom: flux,
            top: flux,
        }
    }

    /// The fluxes that hold a temperature gradient of
    /// $`(\partial T/\partial x, \partial T/\partial y)`$ at the surface of a
    /// material of conductivity `thermal_conductivity`.
    ///
    /// Heat flows against the gradient, so a positive
    /// $`\partial T/\partial x`$ means heat leaving through the left and
    /// entering through the right.
    pub fn from_gradient(thermal_conductivity: Float, dt_dx: Float, dt_dy: Float) -> Self {
        Self {
            left: thermal_conductivity * dt_dx,
            right: -thermal_conductivity * dt_dx,
            bottom: thermal_conductivity * dt_dy,
            top: -thermal_conductivity * dt_dy,
        }
    }
}

impl HeatFlux for FaceFlux {
    fn flux(&self, face: Face, _surface_temperature: Float) -> Float {
        match face {
            Face::Left => self.left,
            Face::Right => self.right,
            Face::Bottom => self.bottom,
            Face::Top => self.top,
        }
    }
}

/***********/
/* TESTING */
/***********/
