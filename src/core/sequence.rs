/// 非同步請求的序號，用來辨識晚到的舊回應
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 「最後發出的請求勝出」：只接受最新發出序號的回應。
/// 關閉 `discard_stale` 時回到原本行為，晚到的回應直接覆寫。
#[derive(Debug, Clone)]
pub struct FetchSequencer {
    issued: u64,
    discard_stale: bool,
}

impl FetchSequencer {
    pub fn new(discard_stale: bool) -> Self {
        Self {
            issued: 0,
            discard_stale,
        }
    }

    pub fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    pub fn latest(&self) -> Option<FetchTicket> {
        (self.issued > 0).then_some(FetchTicket(self.issued))
    }

    pub fn accepts(&self, ticket: FetchTicket) -> bool {
        !self.discard_stale || ticket.0 == self.issued
    }
}

impl Default for FetchSequencer {
    fn default() -> Self {
        Self::new(true)
    }
}
