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

//! A microprocessor, optionally packed in a ceramic case and cooled
//! by an aluminium heat sink.

use crate::analysis::mean_temperature;
use crate::convection::HeatFlux;
use crate::error::{ThermalError, ThermalResult};
use crate::geometry::{compile, CompiledGeometry, MaterialObject};
use crate::solver::{self, Solution, SolverOptions};
use crate::Float;
use serde::{Deserialize, Serialize};

/// Thermal conductivity of the silicon die, in $`W/m.K`$
pub const PROCESSOR_CONDUCTIVITY: Float = 150.;
/// Heat generated by the die, in $`W/m^3`$
pub const PROCESSOR_POWER_DENSITY: Float = 5e8;
/// Thermal conductivity of the ceramic case, in $`W/m.K`$
pub const CASE_CONDUCTIVITY: Float = 230.;
/// Thermal conductivity of aluminium, in $`W/m.K`$
pub const HEAT_SINK_CONDUCTIVITY: Float = 250.;

/// The die: 14mm x 1mm, with its bottom-left corner at the origin
pub fn processor() -> MaterialObject {
    MaterialObject::new("processor", (0., 0.), (14e-3, 1e-3), PROCESSOR_CONDUCTIVITY)
        .with_power_density(PROCESSOR_POWER_DENSITY)
}

/// The case: 20mm x 2mm, sitting on top of the die and centred on it
pub fn case() -> MaterialObject {
    MaterialObject::new("case", (-3e-3, 1e-3), (20e-3, 2e-3), CASE_CONDUCTIVITY)
}

/// A finned heat sink, sitting on top of the case. All dimensions
/// are in $`m`$.
///
/// ```text
///  |  |  |  |     <- fins
/// +----------+    <- base
///   [======]      <- case
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatSink {
    /// The width of the base, which is centred on the case
    pub base_width: Float,

    pub base_height: Float,

    /// The thickness of each fin
    pub fin_width: Float,

    /// How tall the fins are. Zero means no fins.
    pub fin_height: Float,

    /// The gap between fins
    pub fin_spacing: Float,
}

impl std::default::Default for HeatSink {
    fn default() -> Self {
        Self {
            base_width: 28e-3,
            base_height: 4e-3,
            fin_width: 1e-3,
            fin_height: 30e-3,
            fin_spacing: 2e-3,
        }
    }
}

impl HeatSink {
    /// How many fins fit on the base, the first one being on its left edge.
    ///
    /// ```math
    /// n = \left\lfloor \frac{w_{base} + s}{w_{fin} + s} \right\rfloor
    /// ```
    pub fn n_fins(&self) -> usize {
        let n = (self.base_width + self.fin_spacing) / (self.fin_width + self.fin_spacing);
        // tolerate round-off when the fins fill the base exactly
        (n + 1e-6).floor().max(0.) as usize
    }

    /// Checks that the dimensions make sense
    pub fn validate(&self) -> ThermalResult<()> {
        let positive = [
            ("base_width", self.base_width),
            ("base_height", self.base_height),
            ("fin_width", self.fin_width),
        ];
        for (name, value) in positive {
            if !(value > 0. && value.is_finite()) {
                return Err(ThermalError::InvalidHeatSink(format!(
                    "{} must be positive... found {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("fin_height", self.fin_height),
            ("fin_spacing", self.fin_spacing),
        ] {
            if !(value >= 0. && value.is_finite()) {
                return Err(ThermalError::InvalidHeatSink(format!(
                    "{} must not be negative... found {}",
                    name, value
                )));
            }
        }
        if self.fin_height > 0. && self.n_fins() == 0 {
            return Err(ThermalError::InvalidHeatSink(format!(
                "fins of width {} do not fit on a base of width {}",
                self.fin_width, self.base_width
            )));
        }
        Ok(())
    }

    /// The base and the fins, on top of `case`
    pub fn objects(&self, case: &MaterialObject) -> Vec<MaterialObject> {
        let x = case.x + case.width / 2. - self.base_width / 2.;
        let y = case.y + case.height;
        let base = MaterialObject::new(
            "heat sink base",
            (x, y),
            (self.base_width, self.base_height),
            HEAT_SINK_CONDUCTIVITY,
        );
        let mut objects = vec![base];
        if self.fin_height > 0. {
            let pitch = self.fin_width + self.fin_spacing;
            objects.extend((0..self.n_fins()).map(|n| {
                MaterialObject::new(
                    &format!("fin {}", n + 1),
                    (x + n as Float * pitch, y + self.base_height),
                    (self.fin_width, self.fin_height),
                    HEAT_SINK_CONDUCTIVITY,
                )
            }));
        }
        objects
    }
}

/// A microprocessor and what surrounds it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroprocessorSystem {
    pub processor: MaterialObject,
    pub case: Option<MaterialObject>,
    pub heat_sink: Option<HeatSink>,
}

/// The solution of a [`MicroprocessorSystem`]
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSolution {
    /// The grid on which the system was solved
    pub geometry: CompiledGeometry,

    pub solution: Solution,

    /// The mean temperature of the die, in $`C`$
    pub processor_temperature: Float,
}

impl MicroprocessorSystem {
    /// The bare die
    pub fn processor_only() -> Self {
        Self {
            processor: processor(),
            case: None,
            heat_sink: None,
        }
    }

    /// The die inside its ceramic case
    pub fn with_case() -> Self {
        Self {
            case: Some(case()),
            ..Self::processor_only()
        }
    }

    /// The die, its case and a heat sink on top
    pub fn with_heat_sink(heat_sink: HeatSink) -> ThermalResult<Self> {
        heat_sink.validate()?;
        Ok(Self {
            heat_sink: Some(heat_sink),
            ..Self::with_case()
        })
    }

    /// All the blocks of material in the system
    pub fn objects(&self) -> Vec<MaterialObject> {
        let mut objects = vec![self.processor.clone()];
        if let Some(case) = &self.case {
            objects.push(case.clone());
            if let Some(heat_sink) = &self.heat_sink {
                objects.extend(heat_sink.objects(case));
            }
        }
        objects
    }

    /// Builds the grid of the system
    pub fn compile(&self, step: Float) -> ThermalResult<CompiledGeometry> {
        compile(&self.objects(), step)
    }

    /// Solves the temperature of the system, starting from a uniform
    /// `initial` temperature.
    ///
    /// Unless `options` say otherwise, convergence is decided by the
    /// temperatures of the processor only.
    pub fn solve<B: HeatFlux + ?Sized>(
        &self,
        initial: Float,
        step: Float,
        boundary: &B,
        options: &SolverOptions,
    ) -> ThermalResult<SystemSolution> {
        let geometry = self.compile(step)?;
        let processor = geometry.region_of(&self.processor)?;
        let options = SolverOptions {
            region: options.region.clone().or_else(|| Some(processor.clone())),
            ..options.clone()
        };
        let solution = solver::solve(
            geometry.uniform_temperature(initial),
            &geometry.masks,
            step,
            boundary,
            &options,
        )?;
        let processor_temperature =
            mean_temperature(&solution.temperatures, &geometry.masks, &processor)?;
        log::info!(
            "Mean processor temperature: {:.2} C ({:?})",
            processor_temperature,
            solution.status
        );
        Ok(SystemSolution {
            geometry,
            solution,
            processor_temperature,
        })
    }
}

/***********/
/* TESTING */
/***********/
