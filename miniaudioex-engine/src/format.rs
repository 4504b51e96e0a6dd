//! Sample formats, channel positions and the format descriptor a data source reports.

/// Sample encoding a source presents to its consumer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SampleFormat {
    Unknown,
    U8,
    S16,
    S24,
    S32,
    #[default]
    F32,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::Unknown => 0,
            SampleFormat::U8 => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S24 => 3,
            SampleFormat::S32 | SampleFormat::F32 => 4,
        }
    }
}

/// Speaker position of one interleaved channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    Mono,
    FrontLeft,
    FrontRight,
    FrontCenter,
    Lfe,
    BackLeft,
    BackRight,
    BackCenter,
    SideLeft,
    SideRight,
    /// Unnamed channel beyond the eight standard positions.
    Aux(u32),
}

/// The default channel layout for `channels` interleaved channels.
///
/// ```text
/// 1: Mono
/// 2: FL FR
/// 3: FL FR FC
/// 4: FL FR FC BC
/// 5: FL FR FC BL BR
/// 6: FL FR FC LFE SL SR
/// 7: FL FR FC LFE BC SL SR
/// 8: FL FR FC LFE BL BR SL SR
/// n: the 8-channel layout followed by Aux(0), Aux(1), ...
/// ```
pub fn standard_channel_map(channels: u32) -> Vec<Channel> {
    use Channel::*;
    match channels {
        0 => Vec::new(),
        1 => vec![Mono],
        2 => vec![FrontLeft, FrontRight],
        3 => vec![FrontLeft, FrontRight, FrontCenter],
        4 => vec![FrontLeft, FrontRight, FrontCenter, BackCenter],
        5 => vec![FrontLeft, FrontRight, FrontCenter, BackLeft, BackRight],
        6 => vec![FrontLeft, FrontRight, FrontCenter, Lfe, SideLeft, SideRight],
        7 => vec![FrontLeft, FrontRight, FrontCenter, Lfe, BackCenter, SideLeft, SideRight],
        n => {
            let mut map = vec![FrontLeft, FrontRight, FrontCenter, Lfe, BackLeft, BackRight, SideLeft, SideRight];
            map.extend((0..n - 8).map(Aux));
            map
        }
    }
}

/// What a data source produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFormat {
    pub format: SampleFormat,
    pub channels: u32,
    pub sample_rate: u32,
    pub channel_map: Vec<Channel>,
}

impl DataFormat {
    /// Descriptor with the standard channel map for `channels`.
    pub fn standard(format: SampleFormat, channels: u32, sample_rate: u32) -> Self {
        Self { format, channels, sample_rate, channel_map: standard_channel_map(channels) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_map_lengths_match() {
        for n in 0..20 {
            assert_eq!(standard_channel_map(n).len(), n as usize, "n={}", n);
        }
    }

    #[test]
    fn common_layouts() {
        assert_eq!(standard_channel_map(1), vec![Channel::Mono]);
        assert_eq!(standard_channel_map(2), vec![Channel::FrontLeft, Channel::FrontRight]);
        assert_eq!(standard_channel_map(6)[3], Channel::Lfe);
        let ten = standard_channel_map(10);
        assert_eq!(ten[8], Channel::Aux(0));
        assert_eq!(ten[9], Channel::Aux(1));
    }

    #[test]
    fn sample_sizes() {
        assert_eq!(SampleFormat::F32.bytes_per_sample(), 4);
        assert_eq!(SampleFormat::S24.bytes_per_sample(), 3);
        assert_eq!(SampleFormat::Unknown.bytes_per_sample(), 0);
    }
}
