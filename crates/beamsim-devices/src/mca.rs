//! Multichannel analyser for a TES detector.

use beamsim_model::{Device, DeviceArgs, DeviceClass, DeviceError, Endpoint};

pub const MCA: DeviceClass = DeviceClass::new("beamsim.devices.mca.Mca", Mca::construct);

const MAX_BINS: i64 = 10_000;

#[derive(Debug, Clone)]
pub struct Mca {
    pub max_bins: usize,
    pub llim: f64,
    pub ulim: f64,
    pub nbins: i64,
}

impl Mca {
    fn construct(args: DeviceArgs) -> Result<Box<dyn Device>, DeviceError> {
        let params = &args.params;
        params.reject_unknown("Mca", &["max_bins", "llim", "ulim", "nbins"])?;
        let max_bins = params.i64_or("Mca", "max_bins", MAX_BINS)?;
        let llim = params.f64_or("Mca", "llim", 200.0)?;
        let ulim = params.f64_or("Mca", "ulim", 1000.0)?;
        let nbins = params.i64_or("Mca", "nbins", 800)?;

        if max_bins <= 0 {
            return Err(DeviceError::invalid("Mca", "max_bins", "must be positive"));
        }
        if nbins <= 0 || nbins > max_bins {
            return Err(DeviceError::invalid(
                "Mca",
                "nbins",
                format!("must be in (0, {}]", max_bins),
            ));
        }
        if llim >= ulim {
            return Err(DeviceError::invalid("Mca", "ulim", format!("must exceed llim ({})", llim)));
        }
        Ok(Box::new(Self {
            max_bins: max_bins as usize,
            llim,
            ulim,
            nbins,
        }))
    }
}

impl Device for Mca {
    fn class_name(&self) -> &'static str {
        "Mca"
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        vec![
            Endpoint::int("COUNTS", 0).doc("ROI Counts"),
            Endpoint::int_array("SPECTRUM", self.max_bins).doc("ROI Histogram"),
            Endpoint::float("LLIM", self.llim).doc("ROI lower limit"),
            Endpoint::float("ULIM", self.ulim).doc("ROI upper limit"),
            Endpoint::int("NBINS", self.nbins).doc("ROI resolution"),
            Endpoint::float_array("CENTERS", self.max_bins),
            Endpoint::float("COUNT_TIME", 1.0).doc("ROI Count Time"),
            Endpoint::int("ACQUIRE", 0).doc("ACQUIRE"),
            Endpoint::int("LOAD_CAL", 0),
        ]
    }
}
